//! Lodgekeep Core Library
//!
//! Domain models, step application engine, ownership rules, publish
//! lifecycle, and storage for the Lodgekeep rental listing platform.

pub mod error;
pub mod invariants;
pub mod lifecycle;
pub mod models;
pub mod permissions;
pub mod steps;
pub mod storage;

pub use error::{Error, Result};
pub use models::*;
pub use permissions::*;
pub use steps::{
    ApplyMode, DiscountSpec, PhotoInput, Step, Step1PropertyDetails, Step2AmenitiesMedia,
    Step3BookingPricing, Step4DiscountRefs, Step4HostDetails, Step4Input,
};
pub use storage::{
    Database, DiscountRepository, DiscountStore, ListingRepository, ListingStore, OtpRepository,
    OtpStore, UserRepository, UserStore,
};
