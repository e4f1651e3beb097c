pub mod front_matter;
pub mod slug;
