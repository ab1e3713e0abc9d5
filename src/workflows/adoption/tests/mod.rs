mod common;
mod gate;
mod retention;
mod workflow;
