//! The eight dashboard charts.

pub mod adoption_trend;
pub mod colors;
pub mod country_map;
pub mod growth_line;
pub mod hireable_bar;
pub mod language_donut;
pub mod language_ranking;
pub mod repo_histogram;
pub mod topic_cloud;

pub use adoption_trend::AdoptionTrendView;
pub use country_map::CountryMapView;
pub use growth_line::GrowthLineView;
pub use hireable_bar::HireableBarView;
pub use language_donut::LanguageDonutView;
pub use language_ranking::LanguageRankingView;
pub use repo_histogram::RepoHistogramView;
pub use topic_cloud::TopicCloudView;
