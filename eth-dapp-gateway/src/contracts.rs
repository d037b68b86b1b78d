//! Typed bindings for the deployed demo contracts.
//!
//! Only the functions and events the gateway calls are declared; the full ABIs
//! produced by the compiler can be checked against these names with
//! [`crate::artifacts::ensure_functions`].

use alloy::sol;

sol! {
    #[sol(rpc)]
    contract Hello {
        event NameChanged(address indexed changer, string newName);

        function greet() external pure returns (string memory);
        function getMyName() external view returns (string memory);
        function setMyName(string memory newName) external;
        function getMaxUint256() external pure returns (uint256);
        function sumUpTo(uint256 n) external pure returns (uint256);
    }
}

sol! {
    #[sol(rpc)]
    contract FundraiserFactory {
        event FundraiserCreated(address indexed fundraiser, address indexed owner);

        function createFundraiser(
            string memory name,
            string memory url,
            string memory imageUrl,
            string memory description,
            address beneficiary
        ) external;
        function fundraisersCount() external view returns (uint256);
        function fundraisers(uint256 limit, uint256 offset) external view returns (address[] memory coll);
    }
}

sol! {
    #[sol(rpc)]
    contract Fundraiser {
        event DonationReceived(address indexed donor, uint256 value);
        event Withdraw(uint256 amount);

        function name() external view returns (string memory);
        function url() external view returns (string memory);
        function imageUrl() external view returns (string memory);
        function description() external view returns (string memory);
        function beneficiary() external view returns (address);
        function owner() external view returns (address);
        function totalDonations() external view returns (uint256);
        function donationsCount() external view returns (uint256);
        function myDonationsCount() external view returns (uint256);
        function myDonations() external view returns (uint256[] memory values, uint256[] memory dates);
        function donate() external payable;
        function withdraw() external;
        function setBeneficiary(address _beneficiary) external;
    }
}

/// Functions the hello viewer needs from a Hello ABI.
pub const HELLO_FUNCTIONS: &[&str] = &["greet", "getMyName", "setMyName", "getMaxUint256", "sumUpTo"];

/// Functions the fundraising app needs from a FundraiserFactory ABI.
pub const FACTORY_FUNCTIONS: &[&str] = &["createFundraiser", "fundraisersCount", "fundraisers"];

/// Functions the fundraising app needs from a Fundraiser ABI.
pub const FUNDRAISER_FUNCTIONS: &[&str] = &[
    "name",
    "url",
    "imageUrl",
    "description",
    "beneficiary",
    "owner",
    "totalDonations",
    "myDonations",
    "donate",
    "withdraw",
    "setBeneficiary",
];
