mod controller;
mod deep_link;
mod ipc;
mod status_icons;
