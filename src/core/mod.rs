/// Packaging and cost arithmetic
pub mod calculator;
/// Daily headcounts and month submission
pub mod calendar;
/// Localities and their team guard
pub mod locality;
/// Weekly menus and their monthly expansion
pub mod menu;
/// Requests to unlock a submitted month
pub mod modification;
/// Date and month keys
pub mod period;
/// Product catalog
pub mod product;
/// Monthly aggregation and report formatting
pub mod report;
/// Teams and their owned records
pub mod team;
