pub use product::{Product, ProductId, Step};
pub use schedule::{Schedule, ScheduleErr};

mod product;
mod schedule;

#[cfg(test)]
pub mod test_support;
