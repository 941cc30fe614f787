pub mod repository_traits;
