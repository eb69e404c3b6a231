pub mod schema {
    pub use relay_db::schema::*;
}
mod store_impl;
pub mod traits;
pub mod transaction;

pub use store_impl::Store;
pub use transaction::StoreTransaction;
