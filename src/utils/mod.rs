//! Cross-cutting helpers

pub mod pcm;
