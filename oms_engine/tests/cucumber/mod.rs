mod oms_world;
mod steps;

pub use oms_world::{OmsWorld, OrderManagementSystem};
