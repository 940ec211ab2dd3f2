mod category;
mod expense;
mod income;

pub use category::Category;
pub use expense::Expense;
pub use income::Income;
