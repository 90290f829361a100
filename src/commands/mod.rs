// Package source commands (get / test / set)
pub mod resource;

pub mod doctor;
