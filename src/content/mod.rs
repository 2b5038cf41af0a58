//! Site content documents: contacts, education timeline and portfolio.
//!
//! Each document is stored as one JSON value under a fixed key and is
//! replaced as a whole on save.

pub mod contacts;
pub mod education;
pub mod ordering;
pub mod portfolio;

pub use contacts::{ContactInfo, CONTACTS_KEY};
pub use education::{EducationCollection, EducationEntry, EntryKind, NewEducationEntry, EDUCATION_KEY};
pub use ordering::Direction;
pub use portfolio::{NewProject, PortfolioCollection, Project, PORTFOLIO_KEY};
