use crate::manager::{Outcome, Request};

/// Messages sent from the UI task to the network task.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Send(Request),
    Quit,
}

/// Messages sent back from the network task.
#[derive(Debug)]
pub enum AppEvent {
    Done(Outcome),
    Status(String),
}
