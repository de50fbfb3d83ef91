#![doc = env!("CARGO_PKG_DESCRIPTION")]

#[doc(inline)]
pub use wrapconv_image as image;

#[doc(inline)]
pub use wrapconv_imgproc as imgproc;

#[doc(inline)]
pub use wrapconv_io as io;

#[doc(inline)]
pub use wrapconv_pipeline as pipeline;
