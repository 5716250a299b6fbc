pub mod value;

pub use value::{id_key, is_nil, record_id, Record, ID_COLUMN};
