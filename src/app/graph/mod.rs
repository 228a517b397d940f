mod build;
mod interaction;
mod view;

pub(in crate::app) use view::node_details;
