//! Contract bindings for the shop and NFT contracts.

use alloy::sol;

sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    #[derive(Debug)]
    contract ClothingShop {
        struct Product {
            string name;
            string description;
            uint256 price;
            string imageUrl;
            uint256 category;
            bool isAvailable;
            uint256 stock;
        }

        event ProductAdded(uint256 indexed productId, string name, uint256 price);
        event ProductPurchased(uint256 indexed productId, address indexed buyer, uint256 indexed tokenId);

        function addProduct(
            string name,
            string description,
            uint256 price,
            string imageUrl,
            uint256 category,
            uint256 stock
        ) external returns (uint256);
        function getProduct(uint256 productId) external view returns (Product memory);
        function deleteProduct(uint256 productId) external;
        function purchaseProduct(uint256 productId) external payable returns (uint256);
        function getAllProductIds() external view returns (uint256[] memory);
        function getProductIdsByPage(uint256 offset, uint256 limit) external view returns (uint256[] memory);
    }
}

sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    #[derive(Debug)]
    contract ClothingNFT {
        struct ProductInfo {
            string name;
            string category;
            uint256 price;
            string size;
            string color;
            bool isAvailable;
        }

        function ownerOf(uint256 tokenId) external view returns (address);
        function tokenURI(uint256 tokenId) external view returns (string memory);
        function getProductInfo(uint256 tokenId) external view returns (ProductInfo memory);
        function totalSupply() external view returns (uint256);
    }
}
