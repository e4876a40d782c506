pub mod cc;
pub mod net;
pub mod queue;
pub mod sim;
pub mod trace;

#[cfg(test)]
mod test;
