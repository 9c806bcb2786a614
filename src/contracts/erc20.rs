//! ERC-20 calls used for token-priced claims

use alloy::sol;

sol! {
    /// The subset of ERC-20 the engine reads and writes
    interface IERC20 {
        // metadata, cached per network
        function symbol() external view returns (string memory);
        function decimals() external view returns (uint8);

        // balance pre-check and approve planning
        function balanceOf(address account) external view returns (uint256);
        function allowance(address owner, address spender) external view returns (uint256);

        /// Exact-amount approval for the claim extension
        function approve(address spender, uint256 amount) external returns (bool);
    }
}
