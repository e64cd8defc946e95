//! Fixed storage keys. All values are JSON-serialized.

/// Whole-cart snapshot, rewritten on every cart mutation.
pub const CART: &str = "doorstepCart";

/// Cart copy handed from the cart page to the checkout flow.
pub const CHECKOUT_CART: &str = "checkoutCart";

/// Bearer token for the storefront API.
pub const ACCESS_TOKEN: &str = "accessToken";

/// Cached user profile (prefills checkout contact fields).
pub const USER_PROFILE: &str = "user";
