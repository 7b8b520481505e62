// Crate entry point. Re-export modules so tests and downstream crates can import them easily.
//
// Responsibilities
// - Only declare and expose modules. No business logic here.
//
// How it is used
// - The out-of-scope API layer wires the application services to its transport.
// - Integration tests import modules from this crate root to reach the code under test.

pub mod core {
    pub mod attendance;
    pub mod gate;
    pub mod hash_chain;
    pub mod ports;
    pub mod punch;
}

pub mod application {
    pub mod errors;
    pub mod ingest;
    pub mod queries;
    pub mod reconcile;
    pub mod verify;
}

pub mod adapters {
    pub mod clock;
    pub mod in_memory {
        pub mod in_memory_attendance;
        pub mod in_memory_directory;
        pub mod in_memory_evidence;
        pub mod in_memory_ledger;
    }
}
