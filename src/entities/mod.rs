//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod budget;
pub mod card;
pub mod category;
pub mod goal;
pub mod payment_method;
pub mod transaction;

// Re-export specific types to avoid conflicts
pub use budget::{Column as BudgetColumn, Entity as Budget, Model as BudgetModel};
pub use card::{Column as CardColumn, Entity as Card, Model as CardModel};
pub use category::{Column as CategoryColumn, Entity as Category, Model as CategoryModel};
pub use goal::{Column as GoalColumn, Entity as Goal, GoalStatus, Model as GoalModel};
pub use payment_method::{
    Column as PaymentMethodColumn, Entity as PaymentMethod, Model as PaymentMethodModel,
};
pub use transaction::{
    Column as TransactionColumn, Entity as Transaction, ExpenseType, Model as TransactionModel,
    TransactionKind, TransactionStatus,
};
