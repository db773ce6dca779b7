mod helpers;
mod invoker;
mod workflow;
