//! Death resolution.
//!
//! A kill folds a `dies` decision through every death hook in play, ordered
//! by [`DeathPriority`](crate::characters::DeathPriority) and then by seat:
//! protections first, then self-kills, then forced kills which see what the
//! protections already decided.

mod pipeline;
