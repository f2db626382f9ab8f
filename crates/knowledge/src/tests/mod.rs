//! Scenario tests spanning ingestion, retrieval and answering.
