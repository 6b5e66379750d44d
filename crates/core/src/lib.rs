//! Volmix core: fader binding matrix, binding file codec and editing session

pub mod domain;
