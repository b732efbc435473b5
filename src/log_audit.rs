// Static check over every source file: tracing calls must carry opaque ids
// and levels only, never patient identity, vital values or free-text reasons.
