pub mod chromium_page;
pub mod page_driver;

#[cfg(test)]
pub(crate) mod fake_page;

pub use chromium_page::ChromiumPage;
pub use page_driver::PageDriver;
