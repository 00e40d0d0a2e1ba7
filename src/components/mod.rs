pub mod score_block;
pub mod team_card;
pub mod timeline;
