pub mod background_watcher_sink;
pub mod blocking_dialog_sink;
pub mod sink_factory;
