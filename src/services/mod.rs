pub mod cycle_service;
pub mod init_service;
pub mod learn_service;
pub mod phase_service;
