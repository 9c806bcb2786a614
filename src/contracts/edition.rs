//! Edition claim extension bindings (fixed and open editions)

use alloy::sol;

sol! {
    /// Claim configuration stored by the extension for one instance
    #[derive(Debug, Default)]
    struct EditionClaim {
        uint32 total;          // Units minted so far
        uint32 totalMax;       // 0 = unlimited
        uint32 walletMax;      // 0 = unlimited
        uint48 startDate;      // Unix seconds, 0 = open
        uint48 endDate;        // Unix seconds, 0 = never
        uint8 storageProtocol;
        bytes32 merkleRoot;    // Non-zero when gated by an allowlist
        string location;
        uint256 tokenId;
        uint256 cost;          // Unit price in the payment currency
        address paymentReceiver;
        address erc20;         // Zero address = native currency
        address signingAddress;
    }

    interface IEditionClaim {
        function getClaim(address creatorContractAddress, uint256 instanceId)
            external view returns (EditionClaim memory);

        function getTotalMints(address minter, address creatorContractAddress, uint256 instanceId)
            external view returns (uint32);

        function MINT_FEE() external view returns (uint256);

        function MINT_FEE_MERKLE() external view returns (uint256);

        function mintProxy(
            address creatorContractAddress,
            uint256 instanceId,
            uint16 mintCount,
            uint32[] calldata mintIndices,
            bytes32[][] calldata merkleProofs,
            address mintFor
        ) external payable;
    }
}
