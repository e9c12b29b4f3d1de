pub mod bar_chart;
pub mod multi_select;
pub mod stat_card;
