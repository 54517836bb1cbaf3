//! Periodic task scheduling
//!
//! Animated displays each need a "next frame" callback every few ticks. They
//! all share one [`TickScheduler`] rather than owning a timer apiece.

pub mod tick;

pub use tick::{TaskHandle, TickScheduler};
