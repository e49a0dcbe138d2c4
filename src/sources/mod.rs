// Base WP-Manga implementation
pub mod wp_manga;

// WP-Manga sites
pub mod manhuaus;
