//! Photopolymerisation curing models.

pub mod contact_lens;
