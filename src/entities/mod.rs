//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod category;
pub mod dining_table;
pub mod menu_item;
pub mod order;
pub mod order_item;
pub mod reservation;
pub mod user;
pub mod user_role;

// Re-export specific types to avoid conflicts
pub use category::{Column as CategoryColumn, Entity as Category, Model as CategoryModel};
pub use dining_table::{
    Column as DiningTableColumn, Entity as DiningTable, Model as DiningTableModel,
};
pub use menu_item::{Column as MenuItemColumn, Entity as MenuItem, Model as MenuItemModel};
pub use order::{Column as OrderColumn, Entity as Order, Model as OrderModel};
pub use order_item::{Column as OrderItemColumn, Entity as OrderItem, Model as OrderItemModel};
pub use reservation::{
    Column as ReservationColumn, Entity as Reservation, Model as ReservationModel,
};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel};
pub use user_role::{Column as UserRoleColumn, Entity as UserRole, Model as UserRoleModel};
