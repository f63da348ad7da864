//! The ETL steps: week filtering, receiver pivot, team recode and the join.

pub mod assemble;
pub mod receivers;
pub mod team;
pub mod weeks;

pub use assemble::{get_bengals_data, left_join};
pub use receivers::{get_receiver_data, pivot, player_name, union};
pub use team::{get_team_data, recode_result};
pub use weeks::remove_bad_weeks;
