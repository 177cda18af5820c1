pub mod arena;
pub mod block;
pub mod error;
pub mod field_layout;
pub mod global;
pub mod handle;
pub mod local;
pub mod manager;
pub mod object_ref;
pub mod ref_counter_update;
pub mod reference;
pub mod state;
