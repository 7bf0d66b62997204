//! # Workflows
//!
//! Multi-step document flows that touch stock. Each public call runs in
//! exactly one SQLite transaction.
//!
//! ## Transaction Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  pool.begin()                                                          │
//! │    1. next_number(kind)          ← first statement is a write, so the  │
//! │                                    transaction owns the write lock     │
//! │    2. load parent document       (GRN: PO, invoice: SO)                │
//! │    3. stock deltas               (GRN: +received, SO: −quantity)       │
//! │    4. insert document + lines                                          │
//! │    5. parent side effects        (PO tally/status, SO payment status)  │
//! │  tx.commit()                                                           │
//! │                                                                         │
//! │  Any `?` before commit drops the transaction → full rollback,          │
//! │  including the allocated number and every stock change.               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod purchasing;
pub mod sales;
