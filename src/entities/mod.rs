pub mod artist;
pub mod cart;
pub mod cart_item;
pub mod contact_message;
pub mod label;
pub mod merch_item;
pub mod order;
pub mod order_item;
pub mod release;
pub mod release_format;

pub use artist::Entity as Artist;
pub use cart::Entity as Cart;
pub use cart_item::Entity as CartItem;
pub use contact_message::Entity as ContactMessage;
pub use label::Entity as Label;
pub use merch_item::Entity as MerchItem;
pub use order::Entity as Order;
pub use order_item::Entity as OrderItem;
pub use release::Entity as Release;
pub use release_format::Entity as ReleaseFormat;
