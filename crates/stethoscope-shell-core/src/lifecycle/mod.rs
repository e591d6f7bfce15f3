mod controller;
mod event;
mod session;
mod state;

pub use {
    controller::{ALREADY_RUNNING_NOTICE, AppLifecycleController, Collaborators, LaunchContext},
    event::{EventSink, ServerEvent, ServerFault, ShellEvent, TrayAction},
    session::ApplicationSession,
    state::{Flow, LifecycleState},
};
