//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the marketplace tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod cultivar;
pub mod farm_profile;
pub mod notification;
pub mod order;
pub mod product;
pub mod profile;
pub mod reservation;
pub mod review;
pub mod user_role;

// Re-export specific types to avoid conflicts
pub use cultivar::{Column as CultivarColumn, Entity as Cultivar, Model as CultivarModel};
pub use farm_profile::{
    Column as FarmProfileColumn, Entity as FarmProfile, Model as FarmProfileModel,
};
pub use notification::{
    Column as NotificationColumn, Entity as Notification, Model as NotificationModel,
};
pub use order::{Column as OrderColumn, Entity as Order, Model as OrderModel, OrderStatus};
pub use product::{Column as ProductColumn, Entity as Product, Model as ProductModel};
pub use profile::{Column as ProfileColumn, Entity as Profile, Model as ProfileModel};
pub use reservation::{
    Column as ReservationColumn, Entity as Reservation, Model as ReservationModel,
    ReservationStatus,
};
pub use review::{Column as ReviewColumn, Entity as Review, Model as ReviewModel};
pub use user_role::{AppRole, Column as UserRoleColumn, Entity as UserRole, Model as UserRoleModel};
