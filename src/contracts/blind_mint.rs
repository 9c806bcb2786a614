//! BlindMint (gacha) claim extension bindings

use alloy::sol;

sol! {
    #[derive(Debug, Default)]
    struct BlindMintClaim {
        uint32 total;
        uint32 totalMax;       // 0 = unlimited
        uint48 startDate;
        uint48 endDate;
        uint8 storageProtocol;
        uint16 tokenVariations;
        uint256 startingTokenId;
        address paymentReceiver;
        address erc20;
        uint256 cost;
        string location;
    }

    /// Reservations are paid up front and delivered once variations are revealed
    #[derive(Debug, Default)]
    struct UserMint {
        uint32 reservedCount;
        uint32 deliveredCount;
    }

    interface IBlindMint {
        function getClaim(address creatorContractAddress, uint256 instanceId)
            external view returns (BlindMintClaim memory);

        function getUserMints(address minter, address creatorContractAddress, uint256 instanceId)
            external view returns (UserMint memory);

        function MINT_FEE() external view returns (uint256);

        function mintReserve(address creatorContractAddress, uint256 instanceId, uint32 mintCount)
            external payable;
    }
}
