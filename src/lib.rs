pub mod net;
pub mod report;
pub mod routing;
pub mod scenario;
pub mod sim;

#[cfg(test)]
mod test;
