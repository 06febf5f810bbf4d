pub mod cart;
pub mod forms;
pub mod latest;
pub mod products;
pub mod sidebar;
pub mod slug;
