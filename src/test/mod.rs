mod address_registry;
mod net_stack;
mod result_writer;
mod scheduler;
mod support;
