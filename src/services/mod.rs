// Local store services
pub mod orders;

// NetSim bridge import
pub mod netsim_import;
