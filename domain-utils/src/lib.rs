mod bid;
mod bid_space;
mod domain;
mod error;
mod utility;

pub use bid::Bid;
pub use bid_space::{
    best_index, feasible_indices, rank_desc, top_n_desc, BidCatalogue, ENUMERATION_WARN_THRESHOLD,
};
pub use domain::{Domain, Issue, Value};
pub use error::DomainError;
pub use utility::AdditiveUtilitySpace;
