mod address;
mod frame;
mod snapshot;
