#![cfg_attr(not(test), no_std)]

pub mod averager;
pub mod clock;
pub mod command;
pub mod report;
