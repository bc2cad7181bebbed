pub mod concession;
pub mod frequency;
pub mod multi_party;

pub use concession::ConcessionStrategy;
pub use frequency::FrequencyModel;
pub use multi_party::MultiPartyStrategy;
